//! Comma-separated program text.

use log::debug;

use crate::error::VmError;

/// Parse `1,0,0,3,99` style program text. Whitespace around tokens (and the
/// trailing newline of a program file) is ignored; blank text is an empty
/// program.
pub fn parse_program(text: &str) -> Result<Vec<i64>, VmError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(Vec::new());
    }

    let program = text
        .split(',')
        .enumerate()
        .map(|(position, token)| {
            let token = token.trim();
            token.parse::<i64>().map_err(|_| VmError::MalformedProgram {
                token: token.to_string(),
                position,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    debug!("parsed program of {} cells", program.len());
    Ok(program)
}
