//! Full-document assembly.
//!
//! The head render produces the whole document shell; the body render
//! (client tree output plus hydration bootstrap) is spliced in just before
//! the shell's closing tags.

use crate::render::RenderError;

/// Closing tags of the outer document shell.
pub const SHELL_SEAM: &str = "</div></body></html>";

/// Bootstrap marker the client runtime picks up to hydrate the page.
pub const HYDRATION_SCRIPT: &str = "<script>self.$HY=self.$HY||{events:[],completed:new WeakSet(),r:{}}</script>";

/// Splice `body` into `head` at the last occurrence of [`SHELL_SEAM`].
pub fn assemble_document(head: &str, body: &str) -> Result<String, RenderError> {
    let seam = head.rfind(SHELL_SEAM).ok_or(RenderError::MissingSeam)?;

    let mut html = String::with_capacity("<!DOCTYPE html>".len() + head.len() + body.len());
    html.push_str("<!DOCTYPE html>");
    html.push_str(&head[..seam]);
    html.push_str(body);
    html.push_str(&head[seam..]);
    Ok(html)
}
