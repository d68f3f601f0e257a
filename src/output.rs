use std::io::{self, Write};

use serde::Serialize;

use crate::domain::{ConnectionConfig, Response};

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Interactive,
    NonInteractive,
}

#[derive(Serialize)]
struct UrlOutput<'a> {
    url: &'a str,
}

#[derive(Serialize)]
struct PathOutput<'a> {
    path: &'a str,
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_response<T: Serialize>(response: &Response<T>) -> io::Result<()> {
        Self::print_json(response)
    }

    /// Prints the config with the token masked.
    pub fn print_config(config: &ConnectionConfig) -> io::Result<()> {
        Self::print_json(&config.redacted())
    }

    pub fn print_url(url: &str) -> io::Result<()> {
        Self::print_json(&UrlOutput { url })
    }

    pub fn print_path(path: &str) -> io::Result<()> {
        Self::print_json(&PathOutput { path })
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}
