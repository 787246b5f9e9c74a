use crate::metadata::{parse_tag_json, MetadataReader, TagMap};
use anyhow::Result;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use thiserror::Error;
use tracing::{debug, warn};

const READY_SENTINEL: &str = "{ready}";

#[derive(Debug, Error)]
pub enum ExifToolError {
    #[error("exiftoolを起動できませんでした: {path}")]
    Spawn {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("exiftoolとの通信に失敗しました")]
    Io(#[from] io::Error),
    #[error("exiftoolが応答前に終了しました")]
    Closed,
}

pub struct ExifTool {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl ExifTool {
    pub fn spawn(executable: &str) -> Result<Self, ExifToolError> {
        let mut child = Command::new(executable)
            .args(["-stay_open", "True", "-@", "-"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| ExifToolError::Spawn {
                path: executable.to_string(),
                source,
            })?;

        let stdin = child.stdin.take().ok_or(ExifToolError::Closed)?;
        let stdout = child.stdout.take().ok_or(ExifToolError::Closed)?;
        debug!("exiftoolを起動しました: {executable}");

        Ok(Self {
            child,
            stdin,
            stdout: BufReader::new(stdout),
        })
    }

    pub fn execute(&mut self, args: &[&str]) -> Result<String, ExifToolError> {
        for arg in args {
            writeln!(self.stdin, "{arg}")?;
        }
        writeln!(self.stdin, "-execute")?;
        self.stdin.flush()?;

        let mut output = String::new();
        let mut line = String::new();
        loop {
            line.clear();
            if self.stdout.read_line(&mut line)? == 0 {
                return Err(ExifToolError::Closed);
            }
            if line.trim_end() == READY_SENTINEL {
                break;
            }
            output.push_str(&line);
        }
        Ok(output)
    }

    pub fn execute_with_extension(
        &mut self,
        extension: &str,
        args: &[&str],
    ) -> Result<String, ExifToolError> {
        let mut full = vec!["-ext", extension];
        full.extend_from_slice(args);
        self.execute(&full)
    }
}

impl Drop for ExifTool {
    fn drop(&mut self) {
        let closed = writeln!(self.stdin, "-stay_open\nFalse").and_then(|_| self.stdin.flush());
        if let Err(err) = closed.and_then(|_| self.child.wait().map(|_| ())) {
            warn!("exiftoolの終了処理に失敗しました: {err}");
        }
    }
}

impl MetadataReader for ExifTool {
    fn query_tags(&mut self, path: &Path, extension: &str, tags: &[&str]) -> Result<Vec<TagMap>> {
        let path = path.to_string_lossy();
        let tag_args: Vec<String> = tags.iter().map(|tag| format!("-{tag}")).collect();

        let mut args = vec!["-j", "-FileName"];
        args.extend(tag_args.iter().map(String::as_str));
        args.push(&path);

        let output = self.execute_with_extension(extension, &args)?;
        parse_tag_json(&output)
    }

    fn dump_mie(&mut self, extension: &str, source: &Path, output: &Path) -> Result<()> {
        let source = source.to_string_lossy();
        let output = output.to_string_lossy();
        self.execute_with_extension(
            extension,
            &["-o", &output, "-all:all", "-icc_profile", &source],
        )?;
        Ok(())
    }

    fn html_dump(&mut self, extension: &str, source: &Path) -> Result<String> {
        let source = source.to_string_lossy();
        Ok(self.execute_with_extension(extension, &["-htmlDump", &source])?)
    }
}
