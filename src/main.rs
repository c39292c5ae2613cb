fn main() {
    if let Err(err) = orion_control::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
