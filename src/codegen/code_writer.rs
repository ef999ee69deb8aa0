//! Indentation-tracking writer for emitted TypeScript.
//!
//! Indentation is held in an `Rc<Cell<usize>>` so an [`IndentGuard`] can stay
//! alive while the writer keeps being borrowed mutably.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

pub struct CodeWriter<W> {
    writer: W,
    indent_level: Rc<Cell<usize>>,
    indent_string: String,
    at_line_start: bool,
}

impl<W: fmt::Write> CodeWriter<W> {
    pub fn with_indent_spaces(writer: W, spaces: usize) -> Self {
        Self {
            writer,
            indent_level: Rc::new(Cell::new(0)),
            indent_string: " ".repeat(spaces),
            at_line_start: true,
        }
    }

    /// Write text without a newline. Adds indentation if at line start.
    pub fn write(&mut self, text: &str) -> fmt::Result {
        if text.is_empty() {
            return Ok(());
        }

        if self.at_line_start {
            for _ in 0..self.indent_level.get() {
                self.writer.write_str(&self.indent_string)?;
            }
            self.at_line_start = false;
        }

        self.writer.write_str(text)
    }

    /// Write text followed by a newline.
    pub fn writeln(&mut self, text: &str) -> fmt::Result {
        self.write(text)?;
        self.blank_line()
    }

    /// Terminate the current line; on an empty line this writes no indentation.
    pub fn blank_line(&mut self) -> fmt::Result {
        self.writer.write_char('\n')?;
        self.at_line_start = true;
        Ok(())
    }

    /// Increase indentation until the returned guard is dropped.
    pub fn indent(&mut self) -> IndentGuard {
        self.indent_level.set(self.indent_level.get() + 1);
        IndentGuard {
            indent_level: Rc::clone(&self.indent_level),
        }
    }

    /// Write a JSDoc block: `/** line */` for one line, a starred block otherwise.
    ///
    /// A `*/` inside a line is written as `*\/` so it cannot close the comment.
    pub fn doc_comment(&mut self, lines: &[String]) -> fmt::Result {
        match lines {
            [] => Ok(()),
            [line] => self.writeln(&format!("/** {} */", line.replace("*/", "*\\/"))),
            lines => {
                self.writeln("/**")?;
                for line in lines {
                    if line.is_empty() {
                        self.writeln(" *")?;
                    } else {
                        self.writeln(&format!(" * {}", line.replace("*/", "*\\/")))?;
                    }
                }
                self.writeln(" */")
            }
        }
    }

    /// Write `header {`, the body one level deeper, then `}`.
    pub fn block<F>(&mut self, header: &str, body: F) -> fmt::Result
    where
        F: FnOnce(&mut Self) -> fmt::Result,
    {
        self.writeln(&format!("{header} {{"))?;
        {
            let _indent = self.indent();
            body(self)?;
        }
        self.writeln("}")
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Restores the previous indentation level when dropped.
pub struct IndentGuard {
    indent_level: Rc<Cell<usize>>,
}

impl Drop for IndentGuard {
    fn drop(&mut self) {
        self.indent_level
            .set(self.indent_level.get().saturating_sub(1));
    }
}
