//! Build script for codesweep.
//!
//! On Windows, embeds `codesweep.manifest` (via `codesweep.rc`) so that
//! walks of deeply nested media folders are not cut off at MAX_PATH. The
//! manifest sets `longPathAware`, which takes effect on Windows 10 v1607+
//! when long paths are enabled system-wide. Other platforms need nothing.

fn main() {
    #[cfg(windows)]
    {
        embed_resource::compile("codesweep.rc", embed_resource::NONE);
        println!("cargo:rerun-if-changed=codesweep.rc");
        println!("cargo:rerun-if-changed=codesweep.manifest");
    }
}
