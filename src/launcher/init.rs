//! Shell integration: a function that `cd`s into `dm jump` results.
//!
//! Called without a name the function prints the jump list instead.

use crate::error::{Error, Result};

/// Generate the init script for `shell`, defining a function named `cmd`.
///
/// # Errors
///
/// Returns an error for unsupported shells.
pub fn generate(shell: &str, cmd: &str) -> Result<String> {
    match shell {
        "bash" | "zsh" => Ok(generate_posix(cmd)),
        "powershell" | "pwsh" => Ok(generate_powershell(cmd)),
        _ => Err(Error::InvalidArgument(format!(
            "unsupported shell: {shell} (supported: bash, zsh, powershell)"
        ))),
    }
}

fn generate_posix(cmd: &str) -> String {
    format!(
        r#"{cmd}() {{
    if [ $# -eq 0 ]; then
        \command dm jump
        return
    fi
    local result
    result="$(\command dm jump "$@")" || return
    if [ -n "$result" ]; then
        \builtin cd -- "$result"
    fi
}}
"#
    )
}

fn generate_powershell(cmd: &str) -> String {
    format!(
        r"function {cmd} {{
    if ($args.Count -eq 0) {{
        & dm jump
        return
    }}
    $result = & dm jump @args
    if ($LASTEXITCODE -eq 0 -and $result) {{
        Set-Location -Path $result
    }}
}}
"
    )
}
