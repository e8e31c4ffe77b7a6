//! Command classification and prompt construction.

/// Personality used when none (or an unknown one) is configured
pub const DEFAULT_PERSONALITY: &str = "sarcastic";

/// Classify a failed command by its program name.
///
/// Categories without a dedicated prompt or fallback bucket are treated as
/// generic downstream.
pub fn classify(command: &str) -> &'static str {
    let Some(program) = command.split_whitespace().next() else {
        return "unknown";
    };

    match program {
        "git" => "git",
        "npm" | "yarn" | "pnpm" => "nodejs",
        "docker" | "docker-compose" => "docker",
        "curl" | "wget" => "http",
        "ssh" => "ssh",
        "cd" => "navigation",
        _ => "generic",
    }
}

/// Voice of one personality
struct Persona {
    role: &'static str,
    traits: &'static str,
    ask: &'static str,
}

fn persona(personality: &str) -> Persona {
    match personality {
        "mild" => Persona {
            role: "a helpful but slightly disappointed terminal assistant",
            traits: "Gentle, constructive, mildly disappointed",
            ask: "Generate a mild, constructive comment. Be helpful but show slight disappointment.",
        },
        "savage" => Persona {
            role: "a brutally savage terminal parrot",
            traits: "Savage, brutal, mercilessly mocking",
            ask: "Generate a savage, brutal roast. Be ruthless and devastating.",
        },
        _ => Persona {
            role: "a sarcastic, witty terminal parrot",
            traits: "Sarcastic, witty, cleverly mocking",
            ask: "Generate a sarcastic but clever one-liner. Be creative and witty.",
        },
    }
}

/// What the failure was about, as named inside the prompt
fn subject(category: &str) -> &'static str {
    match category {
        "git" => "git",
        "nodejs" => "Node.js/npm",
        "docker" => "Docker",
        "http" => "HTTP request",
        _ => "command",
    }
}

fn examples(personality: &str, category: &str) -> [&'static str; 3] {
    match (personality, category) {
        ("mild", "git") => [
            "Git command failed. Maybe check your remote branch?",
            "Oops, that didn't work. Double-check your git status.",
            "Git hiccup detected. Have you tried git pull first?",
        ],
        ("mild", "nodejs") => [
            "NPM seems unhappy. Try clearing your cache?",
            "Node modules acting up. Maybe npm install again?",
            "Package installation hiccup. Check your package.json?",
        ],
        ("mild", "docker") => [
            "Container seems upset. Check your Dockerfile?",
            "Docker command failed. Is the daemon running?",
            "Build didn't work. Maybe check those port mappings?",
        ],
        ("mild", "http") => [
            "Request didn't go through. Check the URL?",
            "Network seems down. Try again in a moment?",
            "HTTP error detected. Is the server running?",
        ],
        ("mild", _) => [
            "Command didn't work as expected. Check the syntax?",
            "Something went wrong. Maybe try the help flag?",
            "Error detected. Double-check your parameters?",
        ],
        ("savage", "git") => [
            "Your git history is a crime scene and you're the only suspect.",
            "Merge conflict? The only conflict is you versus competence.",
            "Even git blame refuses to be associated with you.",
        ],
        ("savage", "nodejs") => [
            "Your node_modules weighs more than your skill set.",
            "npm ERR! Developer not found.",
            "Even left-pad had more going for it than this build.",
        ],
        ("savage", "docker") => [
            "Your container crashed faster than your career.",
            "Docker can isolate processes, not incompetence.",
            "That image is broken in every layer, just like you.",
        ],
        ("savage", "http") => [
            "The server saw your request and chose violence.",
            "Connection refused. Smart server.",
            "Even a 404 page has more purpose than you.",
        ],
        ("savage", _) => [
            "Your command failed harder than you failed at life.",
            "Error: User incompetence exceeds system limitations.",
            "This failure defines your existence.",
        ],
        (_, "git") => [
            "Another git genius who forgot to pull first. Classic.",
            "Git good? More like git wrecked!",
            "Your commits are as broken as your workflow.",
        ],
        (_, "nodejs") => [
            "NPM install failed? Shocking! Nobody saw that coming.",
            "Node modules: where dependencies go to die.",
            "Your package.json is crying. Fix it.",
        ],
        (_, "docker") => [
            "Docker container more like docker DISASTER!",
            "Even containers can't contain your incompetence.",
            "Your Dockerfile needs therapy.",
        ],
        (_, "http") => [
            "404: Competence not found.",
            "Even the internet doesn't want to talk to you.",
            "Connection refused? So is your logic.",
        ],
        _ => [
            "Wow, you managed to break something simple. Impressive!",
            "Maybe try reading the manual... oh wait, who am I kidding?",
            "Error code says it all: user error!",
        ],
    }
}

/// Render the prompt for one failed command.
pub fn build_prompt(category: &str, command: &str, exit_code: i32, personality: &str) -> String {
    let personality = match personality {
        "mild" | "sarcastic" | "savage" => personality,
        _ => DEFAULT_PERSONALITY,
    };
    let voice = persona(personality);
    let subject = subject(category);
    let [first, second, third] = examples(personality, category);

    format!(
        "You are {role} commenting on a failed {subject}.\n\
         Command that failed: {command}\n\
         Exit code: {exit_code}\n\
         Personality: {traits}\n\
         \n\
         {ask} Reference {subject} concepts where you can. Keep it under 100 characters.\n\
         Examples:\n\
         - \"{first}\"\n\
         - \"{second}\"\n\
         - \"{third}\"\n\
         \n\
         Response:",
        role = voice.role,
        traits = voice.traits,
        ask = voice.ask,
    )
}
