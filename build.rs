use std::{env, fs, path::PathBuf};

fn main() {
    // Pick the linker memory layout for the board being built; host builds need none.
    let target = env::var("TARGET").unwrap();
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let memory_file = if target.starts_with("thumbv8m") {
        // Pico 2 ARM
        Some("memory-pico2.x")
    } else if target.starts_with("thumbv6m") {
        // Pico 1
        Some("memory-pico1.x")
    } else {
        None
    };

    if let Some(memory_file) = memory_file {
        let memory_x =
            fs::read_to_string(memory_file).unwrap_or_else(|_| panic!("Failed to read {memory_file}"));
        fs::write(out_dir.join("memory.x"), memory_x).expect("Failed to write memory.x");
        println!("cargo:rustc-link-search={}", out_dir.display());
        println!("cargo:rerun-if-changed={memory_file}");

        // Firmware links against cortex-m-rt and defmt; host tests must not.
        if env::var_os("CARGO_FEATURE_ARM").is_some() {
            println!("cargo:rustc-link-arg-examples=--nmagic");
            println!("cargo:rustc-link-arg-examples=-Tlink.x");
            if target.starts_with("thumbv6m") {
                println!("cargo:rustc-link-arg-examples=-Tlink-rp.x");
            }
            println!("cargo:rustc-link-arg-examples=-Tdefmt.x");
        }
    }
}
