/*
    Coupe

    Copyright 2022-2025 Daniel Balsom

    Permission is hereby granted, free of charge, to any person obtaining a
    copy of this software and associated documentation files (the “Software”),
    to deal in the Software without restriction, including without limitation
    the rights to use, copy, modify, merge, publish, distribute, sublicense,
    and/or sell copies of the Software, and to permit persons to whom the
    Software is furnished to do so, subject to the following conditions:

    The above copyright notice and this permission notice shall be included in
    all copies or substantial portions of the Software.

    THE SOFTWARE IS PROVIDED “AS IS”, WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
    IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
    FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
    AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
    LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
    FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
    DEALINGS IN THE SOFTWARE.

    --------------------------------------------------------------------------

    coupe_core::tracelogger.rs
*/
//! A logging sink handed to devices that want a per-access trace, separate from the `log` facade.
//! The port dispatcher writes one line per read or write when a trace file is configured.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

#[derive(Debug, Default)]
pub enum TraceLogger {
    FileWriter(BufWriter<File>),
    Console,
    /// Collects lines in memory, for inspection by tests and debug front ends.
    Buffer(Vec<String>),
    #[default]
    None,
}

impl TraceLogger {
    pub fn from_filename<S: AsRef<Path>>(filename: S) -> Self {
        match File::create(filename.as_ref()) {
            Ok(file) => TraceLogger::FileWriter(BufWriter::new(file)),
            Err(e) => {
                log::error!(
                    "Couldn't create trace log file {}: {}",
                    filename.as_ref().display(),
                    e
                );
                TraceLogger::None
            }
        }
    }

    #[inline(always)]
    pub fn println<S: AsRef<str> + std::fmt::Display>(&mut self, msg: S) {
        match self {
            TraceLogger::FileWriter(buf) => {
                _ = buf.write_all(msg.as_ref().as_bytes());
                _ = buf.write_all(b"\n");
            }
            TraceLogger::Console => println!("{}", msg),
            TraceLogger::Buffer(lines) => lines.push(msg.to_string()),
            TraceLogger::None => (),
        }
    }

    pub fn flush(&mut self) {
        if let TraceLogger::FileWriter(file) = self {
            if let Err(e) = file.flush() {
                log::error!("Failed to flush trace log: {}", e);
            }
        }
    }

    /// Lines collected by a [TraceLogger::Buffer], empty for every other sink.
    pub fn lines(&self) -> &[String] {
        match self {
            TraceLogger::Buffer(lines) => lines,
            _ => &[],
        }
    }

    #[inline(always)]
    pub fn is_some(&self) -> bool {
        !matches!(*self, TraceLogger::None)
    }
}
