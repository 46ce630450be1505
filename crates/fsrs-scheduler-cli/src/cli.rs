// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::path::PathBuf;

use clap::Parser;
use fsrs_scheduler_core::Fallible;
use fsrs_scheduler_core::Scheduler;

use crate::cmd::config::print_config;
use crate::cmd::review::review_card;
use crate::config::load_config;
use crate::serve::server::start_server;

#[derive(Parser)]
#[command(version, about, long_about = None)]
enum Command {
    /// Serve the scheduler over HTTP.
    Serve {
        /// Address to listen on.
        #[arg(long, env = "HOST", default_value = "0.0.0.0")]
        host: String,
        /// Port to listen on.
        #[arg(long, env = "PORT", default_value_t = 6000)]
        port: u16,
        /// Path to a TOML scheduler configuration.
        #[arg(long, env = "FSRS_CONFIG")]
        config: Option<PathBuf>,
    },
    /// Review a single card. Reads a JSON request and prints the response.
    Review {
        /// Path to a TOML scheduler configuration.
        #[arg(long, env = "FSRS_CONFIG")]
        config: Option<PathBuf>,
        /// Path to the request. Standard input if omitted.
        input: Option<PathBuf>,
    },
    /// Print the scheduler configuration as TOML.
    Config {
        /// Path to a TOML scheduler configuration. Defaults if omitted.
        #[arg(long, env = "FSRS_CONFIG")]
        config: Option<PathBuf>,
    },
}

pub async fn entrypoint() -> Fallible<()> {
    let cli: Command = Command::parse();
    match cli {
        Command::Serve { host, port, config } => {
            let config = load_config(config.as_deref())?;
            let scheduler = Scheduler::new(config)?;
            start_server(&host, port, scheduler).await
        }
        Command::Review { config, input } => review_card(config, input),
        Command::Config { config } => print_config(config),
    }
}
