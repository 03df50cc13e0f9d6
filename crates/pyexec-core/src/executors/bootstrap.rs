//! Rendering of the in-container bootstrap script
//!
//! The script runs as the container's command: it installs venv support
//! quietly, builds a throwaway virtual environment, installs the requested
//! libraries into it and runs the user script with the venv's interpreter.

const VENV_DIR: &str = "/tmp/pyenv";

/// Render the bootstrap script. `workdir` is the in-container mount point of
/// the workspace. Library names are emitted verbatim and must already be
/// validated.
pub fn render(libraries: &[String], workdir: &str) -> String {
    let workdir = workdir.trim_end_matches('/');
    let mut script = String::from("#!/bin/bash\nset -e\n");

    script.push_str("apt-get update -qq > /dev/null 2>&1\n");
    script.push_str("apt-get install -y python3-venv -qq > /dev/null 2>&1\n");
    script.push_str(&format!("python3 -m venv {}\n", VENV_DIR));

    if !libraries.is_empty() {
        script.push_str(&format!(
            "{}/bin/pip install --no-cache-dir --quiet {}\n",
            VENV_DIR,
            libraries.join(" ")
        ));
    }

    script.push_str(&format!(
        "cd {dir} && {venv}/bin/python {dir}/{file}\n",
        dir = workdir,
        venv = VENV_DIR,
        file = super::workspace::SCRIPT_FILENAME,
    ));
    script
}
