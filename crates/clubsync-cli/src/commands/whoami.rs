use crate::commands::common::Engine;

pub fn run_whoami(engine: &Engine) {
    println!("{}", engine.user());
    let remote = engine
        .remote()
        .as_ref()
        .map_or("local-only", |remote| remote.base_url());
    println!("remote: {remote}");
    println!("connectivity: {}", engine.connectivity().status().as_str());
}
