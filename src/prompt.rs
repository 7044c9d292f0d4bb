//! Interactive prompting for missing path variables

use std::collections::HashMap;
use std::io::{BufRead, Write};

use crate::error::{Error, Result};

/// Ask for one `{name}` value; the answer is trimmed.
///
/// End of input before an answer counts as the variable being missing.
pub fn prompt_for_variable<R: BufRead, W: Write>(
    name: &str,
    input: &mut R,
    output: &mut W,
) -> Result<String> {
    write!(output, "Enter value for {{{name}}}: ")
        .and_then(|_| output.flush())
        .map_err(|e| Error::storage("write prompt", name, e))?;

    let mut line = String::new();
    let read = input
        .read_line(&mut line)
        .map_err(|e| Error::storage("read prompt input", name, e))?;
    if read == 0 {
        return Err(Error::MissingVariables(vec![name.to_string()]));
    }
    Ok(line.trim().to_string())
}

/// Prompt for each name in order.
pub fn prompt_for_variables<R: BufRead, W: Write>(
    names: &[String],
    input: &mut R,
    output: &mut W,
) -> Result<HashMap<String, String>> {
    let mut values = HashMap::new();
    for name in names {
        let value = prompt_for_variable(name, input, output)?;
        values.insert(name.clone(), value);
    }
    Ok(values)
}
