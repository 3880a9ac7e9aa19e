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

    coupe_config::bpaf_config::mod.rs
*/
use std::path::PathBuf;

use crate::mount::MountSpec;
use coupe_core::{AutoloadType, DriveType};

use bpaf::{Bpaf, Parser};

fn mount_arg() -> impl Parser<Vec<MountSpec>> {
    bpaf::short('m')
        .long("mount")
        .help("Mount media with syntax: d1:disk.mgt or boot:disk.mgt?autoload")
        .argument::<String>("mountspec")
        .parse(|s| s.parse::<MountSpec>())
        .many()
}

#[cfg_attr(feature = "use_bpaf", derive(Bpaf))]
#[cfg_attr(feature = "use_bpaf", bpaf(options, version, generate(cli_args)))]
#[derive(Debug, Default)]
pub struct CmdLineArgs {
    #[bpaf(long("config_file"), long("configfile"))]
    pub config_file: Option<PathBuf>,

    #[bpaf(long("state_dir"), long("statedir"))]
    pub state_dir: Option<PathBuf>,

    #[bpaf(long)]
    pub drive1: Option<DriveType>,
    #[bpaf(long)]
    pub drive2: Option<DriveType>,

    #[bpaf(long)]
    pub autoload: Option<AutoloadType>,

    /// Number of frames to run before exiting.
    #[bpaf(long)]
    pub frames: Option<u64>,

    #[bpaf(long("asic_startup"), switch)]
    pub asic_startup: bool,

    #[bpaf(long("no_clock"), long("noclock"), switch)]
    pub no_clock: bool,

    #[bpaf(long("port_trace"))]
    pub port_trace_file: Option<PathBuf>,

    #[bpaf(long("dump_io_stats"), switch)]
    pub dump_io_stats: bool,

    #[bpaf(external(mount_arg))]
    pub mounts: Vec<MountSpec>,
}
