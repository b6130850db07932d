//! `${var}` placeholder expansion for command argument vectors.

use std::path::Path;

/// Variables available to command templates.
pub(crate) struct TemplateVars<'a> {
    /// The step's resolved input path, if it declares one.
    pub input: Option<&'a Path>,
    /// The project's output directory.
    pub out_dir: &'a Path,
    /// The project root.
    pub root: &'a Path,
}

/// Expands `${input}`, `${out_dir}`, and `${root}` in a single argument.
///
/// Placeholders may appear anywhere in the argument and mix with literal
/// text, so `${input}.spv` works. Unknown or unterminated placeholders are
/// errors, as is `${input}` in a step that declares no input.
pub(crate) fn expand(arg: &str, vars: &TemplateVars<'_>) -> Result<String, String> {
    let mut out = String::with_capacity(arg.len());
    let mut rest = arg;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            return Err(format!("unterminated placeholder in '{arg}'"));
        };
        match &after[..end] {
            "input" => match vars.input {
                Some(path) => out.push_str(&path.to_string_lossy()),
                None => return Err("'${input}' used in a step with no input".to_string()),
            },
            "out_dir" => out.push_str(&vars.out_dir.to_string_lossy()),
            "root" => out.push_str(&vars.root.to_string_lossy()),
            other => return Err(format!("unknown placeholder '${{{other}}}'")),
        }
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}
