use scene_sandbox::{SandboxConfig, flow, scenes};

fn main() {
    let settings = SandboxConfig::from_env();
    if let Err(e) = flow::run(settings, scenes::all_constructors()) {
        eprintln!("scene-sandbox: {e:#}");
        std::process::exit(1);
    }
}
