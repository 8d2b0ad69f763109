//! Control Server
//!
//! Entry point: parses the command line, initializes logging and runs one
//! controller until it is shut down.
//!
//! # Architecture Overview
//!
//! ```text
//!   argv
//!     │
//!     ▼
//!  ┌────────┐   help/version   ┌─────────┐
//!  │ config │ ───────────────▶ │ stdout  │  exit 0
//!  └───┬────┘                  └─────────┘
//!      │ RunConfiguration
//!      ▼
//!  ┌───────────────┐
//!  │ observability │  logging init (fatal on failure)
//!  └───┬───────────┘
//!      ▼
//!  ┌───────────┐  sync?  ┌────────────────┐
//!  │ lifecycle │ ──────▶ │ SyncController │ ─┐
//!  │ bootstrap │         └────────────────┘  │   timeout → rp → rt
//!  │           │  else   ┌─────────────────┐ ├─▶ → [restore] → run(host)
//!  │           │ ──────▶ │ AsyncController │ ┘
//!  └───────────┘         └─────────────────┘
//! ```

use std::io;
use std::process::ExitCode;

use control_server::controller::DefaultControllerFactory;
use control_server::lifecycle::Bootstrap;
use control_server::observability::TracingLogger;

fn main() -> ExitCode {
    let mut bootstrap = Bootstrap::new(TracingLogger, DefaultControllerFactory);
    bootstrap
        .execute(std::env::args_os(), &mut io::stdout(), &mut io::stderr())
        .into()
}
