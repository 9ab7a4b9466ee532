//! Tail of the evaluation engine's console log

use std::fs;
use std::io;
use std::path::Path;

use log::debug;

use crate::settings::eval_output_dir;

pub const CONSOLE_FILE: &str = "console.out";
pub const NO_OUTPUT_PLACEHOLDER: &str =
    "No output file found! Start a new evaluation to see the output...";
const PROMPT: &str = "foo@bar:~$ ";

/// Full contents of `dir/name`; `io::ErrorKind::NotFound` if absent.
pub fn read_file(dir: &Path, name: &str) -> io::Result<String> {
    fs::read_to_string(dir.join(name))
}

/// Console output for the latest evaluation, with each line break followed
/// by a shell prompt. Any failure degrades to [`NO_OUTPUT_PLACEHOLDER`].
pub fn console_output(payload: Option<&str>) -> String {
    let dir = match eval_output_dir(payload) {
        Ok(dir) => dir,
        Err(e) => {
            debug!("no evaluation output directory: {}", e);
            return NO_OUTPUT_PLACEHOLDER.to_string();
        }
    };

    match read_file(&dir, CONSOLE_FILE) {
        Ok(text) => decorate(&text),
        Err(e) => {
            debug!("cannot read {}: {}", dir.join(CONSOLE_FILE).display(), e);
            NO_OUTPUT_PLACEHOLDER.to_string()
        }
    }
}

fn decorate(text: &str) -> String {
    text.replace('\n', &format!("\n{PROMPT}"))
}
