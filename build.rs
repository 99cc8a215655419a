fn main() {
    // Setup cfg aliases
    cfg_aliases::cfg_aliases! {
        // Platforms
        wgl: { target_os = "windows" },
        glx: {
            any(
                target_os = "linux",
                target_os = "dragonfly",
                target_os = "freebsd",
                target_os = "netbsd",
                target_os = "openbsd"
            )
        },
        // Backends
        dummy: { not(any(wgl, glx)) },
    }

    println!("cargo:rerun-if-changed=build.rs");
}
