//! # Shader Linker (Binary)
//!
//! Resolves `#import` directives in GLSL root shaders.

fn main() {
    if let Err(e) = linker_app::run() {
        linker_app::report_error(&e);
        std::process::exit(1);
    }
}
