//! The `quiztutor init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    let path = Path::new("quiztutor.toml");
    if path.exists() {
        println!("quiztutor.toml already exists, skipping.");
    } else {
        std::fs::write(path, SAMPLE_CONFIG)?;
        println!("Created quiztutor.toml");
    }

    println!("\nNext steps:");
    println!("  1. Set QUIZTUTOR_GEMINI_KEY or edit quiztutor.toml with your API keys");
    println!("  2. Run: quiztutor play --topic \"Photosynthesis\" --difficulty medium");
    println!("  3. Try it offline: quiztutor play --topic Demo --provider mock");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# quiztutor configuration

default_provider = "gemini"
default_model = "gemini-1.5-pro-latest"
temperature = 0.7
max_tokens = 1024
dedup_attempts = 5
echo_prompts = false

[providers.gemini]
type = "gemini"
api_key = "${GEMINI_API_KEY}"

[providers.openai]
type = "openai"
api_key = "${OPENAI_API_KEY}"

[providers.ollama]
type = "ollama"
base_url = "http://localhost:11434"

# Scripted replies for trying the quiz loop without an API key.
[providers.mock]
type = "mock"
responses = [
    """What color is a clear daytime sky?
A. Green
B. Blue
C. Red
D. Yellow
Answer: B
Explanation: Air scatters short blue wavelengths more than long ones.""",
    """How many legs does a spider have?
A. Six
B. Four
C. Eight
D. Ten
Answer: C
Explanation: Spiders are arachnids, which have eight legs.""",
    """Which planet is closest to the Sun?
A. Mercury
B. Venus
C. Earth
D. Mars
Answer: A
Explanation: Mercury orbits nearest the Sun.""",
    """What is frozen water called?
A. Steam
B. Ice
C. Dew
D. Fog
Answer: B
Explanation: Water becomes solid ice at 0 degrees Celsius.""",
    """Which gas do plants absorb for photosynthesis?
A. Oxygen
B. Nitrogen
C. Helium
D. Carbon dioxide
Answer: D
Explanation: Plants take in carbon dioxide and release oxygen.""",
]

[[providers.mock.rules]]
needle = "hint for this quiz question"
replies = ["Rule out the options that clearly belong to something else."]

[[providers.mock.rules]]
needle = "A student asked"
replies = ["Good question! Look again at what each option describes."]
"#;
