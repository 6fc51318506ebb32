// Main entry point that forwards to the linker-app binary
fn main() {
    // Exit with the same code as the app
    std::process::exit(match linker_app::run() {
        Ok(()) => 0,
        Err(e) => {
            linker_app::report_error(&e);
            1
        }
    });
}
