fn main() {
    if let Err(err) = bridge_map::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
