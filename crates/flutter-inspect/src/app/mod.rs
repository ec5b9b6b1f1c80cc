//! CLI application layer and composition root wiring.

use anyhow::Result;
use clap::Parser;
use tracing::debug;

pub mod commands;
pub mod error;
pub mod handlers;

use crate::adapters::presenter::Presenter;
use crate::app::commands::Cli;
use crate::app::error::CliError;
use crate::app::handlers::HandlerContext;
use crate::common::color_init;
use crate::common::telemetry;
use crate::infra::config::InspectConfig;
use crate::infra::discovery::default_cascade;
use crate::infra::signal_handler::SignalHandler;
use crate::infra::vm_service::{ConnectOptions, VmServiceClient};
use crate::usecases::InspectUseCase;

mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
}

#[derive(Default)]
pub struct Application;

impl Application {
    pub fn new() -> Self {
        Self
    }

    pub fn run(&self) -> Result<i32> {
        let cli = Cli::parse();
        let _telemetry = telemetry::init_tracing(if cli.verbose { "debug" } else { "warn" });
        color_init(cli.no_color);

        let ctx = HandlerContext::new(cli.effective_format(), cli.quiet, cli.tokens);
        debug!(
            format = ?ctx.format,
            mode = ?cli.inspect_mode(),
            watch = cli.watch,
            "CLI arguments parsed"
        );

        let exit_code = match self.execute(&cli, &ctx) {
            Ok(()) => exit_codes::SUCCESS,
            Err(e) => self.handle_error(&e, ctx.presenter()),
        };
        Ok(exit_code)
    }

    fn execute(&self, cli: &Cli, ctx: &HandlerContext) -> Result<()> {
        let config = InspectConfig::from_env();
        let discovery = default_cascade(&config);

        if cli.list {
            return handlers::handle_list(ctx, &discovery);
        }

        let uri = handlers::resolve_uri(ctx, cli.uri.as_deref(), cli.index, &discovery)?;
        ctx.note(&format!("Connecting to: {uri}"));

        let options = ConnectOptions::from_config(&config);
        let usecase = InspectUseCase::new(cli.semantics_order());

        if cli.watch {
            let signals = SignalHandler::install().map_err(CliError::from)?;
            let updates =
                handlers::handle_watch(ctx, &usecase, &signals, cli.interval_duration(), || {
                    let client = VmServiceClient::connect(&uri, &options)?;
                    let abort = client.abort_handle();
                    Ok((client, abort))
                })?;
            debug!(updates, "Watch stopped");
            return Ok(());
        }

        let mut client = VmServiceClient::connect(&uri, &options)?;
        handlers::handle_inspect(ctx, &usecase, &mut client, cli.inspect_mode(), &uri)
    }

    fn handle_error(&self, e: &anyhow::Error, presenter: &dyn Presenter) -> i32 {
        debug!(error = ?e, "Command failed");
        presenter.present_error(&handlers::error_view(e));
        exit_codes::GENERAL_ERROR
    }
}
