//! Generate `posts_ffi.h` for C and mobile hosts.

use std::env;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=src");
    let (Ok(crate_dir), Ok(out_dir)) = (env::var("CARGO_MANIFEST_DIR"), env::var("OUT_DIR")) else {
        return;
    };

    let result = cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_language(cbindgen::Language::C)
        .with_include_guard("POSTS_FFI_H")
        .with_documentation(true)
        .generate();

    match result {
        Ok(bindings) => {
            bindings.write_to_file(PathBuf::from(out_dir).join("posts_ffi.h"));
        }
        Err(e) => println!("cargo:warning=cbindgen could not generate posts_ffi.h: {e}"),
    }
}
