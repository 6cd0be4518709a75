fn main() {
    if let Err(err) = stain_area_lib::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
