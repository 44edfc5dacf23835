fn main() {
    if let Err(err) = gamecafe::app::run() {
        eprintln!("application startup failed: {err}");
        std::process::exit(1);
    }
}
