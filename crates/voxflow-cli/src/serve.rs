//! The `serve` command: run the HTTP facade.

use clap::Args;

use voxflow_axum::ServerConfig;
use voxflow_pipeline::PipelineConfig;

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Port to listen on.
    #[arg(long, default_value_t = 8000, env = "VOXFLOW_PORT")]
    pub port: u16,

    /// Address to listen on.
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Synthesis backend host.
    #[arg(long, default_value = "127.0.0.1", env = "VOXFLOW_BACKEND_IP")]
    pub backend_ip: String,

    /// Synthesis backend port.
    #[arg(long, default_value_t = 9998, env = "VOXFLOW_BACKEND_PORT")]
    pub backend_port: u16,
}

pub async fn run(args: ServeArgs) -> anyhow::Result<()> {
    let config = ServerConfig {
        host: args.host,
        port: args.port,
        pipeline: PipelineConfig {
            host: args.backend_ip,
            port: args.backend_port,
            ..PipelineConfig::default()
        },
    };
    voxflow_axum::serve(config).await
}
