//! Canned responses used when no backend answers in time.

use crate::providers::{BackendKind, GenerationResult};

/// Bucket used for categories without their own table entry
pub const GENERIC: &str = "generic";

const GIT: &[&str] = &[
    "Git good? More like git rekt!",
    "Did you forget to pull again? Classic amateur move.",
    "Another git genius strikes again!",
    "Your commits are as broken as your workflow.",
];

const NODEJS: &[&str] = &[
    "NPM install failed? Shocking! Nobody saw that coming.",
    "Your package.json is crying. Fix it.",
    "Node modules: where dependencies go to die.",
    "Even npm doesn't want to deal with your code.",
];

const DOCKER: &[&str] = &[
    "Docker container more like docker DISASTER!",
    "Even containers can't contain your incompetence.",
    "Your Dockerfile needs therapy.",
    "Container exit code: user error detected.",
];

const HTTP: &[&str] = &[
    "404: Competence not found.",
    "Even the internet doesn't want to talk to you.",
    "Connection refused? So is your logic.",
    "HTTP status: 500 Internal User Error.",
];

const GENERIC_LINES: &[&str] = &[
    "Wow, you managed to break something simple. Impressive!",
    "Maybe try reading the manual... oh wait, who am I kidding?",
    "Error code says it all: user error!",
    "Have you tried turning your brain on and off again?",
];

/// Lines for `category`, or the generic bucket if it has none.
pub fn bucket(category: &str) -> &'static [&'static str] {
    match category {
        "git" => GIT,
        "nodejs" => NODEJS,
        "docker" => DOCKER,
        "http" => HTTP,
        _ => GENERIC_LINES,
    }
}

/// Pick a canned line for `category`.
///
/// A pure function of the category string: a rolling hash of it, modulo the
/// bucket size. Not uniformly distributed and not meant to be.
pub fn pick(category: &str) -> &'static str {
    let lines = bucket(category);
    let index = (rolling_hash(category) % lines.len() as u64) as usize;
    lines[index]
}

/// The fallback tier's answer. Already short and clean, so never sanitized.
pub fn result(category: &str) -> GenerationResult {
    GenerationResult::new(pick(category), BackendKind::Fallback)
}

fn rolling_hash(text: &str) -> u64 {
    text.chars()
        .fold(0i64, |hash, c| hash.wrapping_mul(31).wrapping_add(c as i64))
        .unsigned_abs()
}
