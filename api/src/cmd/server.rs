use ideaboard_api::tracing_config::{self, HoneycombConfig};

pub async fn run(mut config: ideaboard_api::config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let honeycomb_config = config.honeycomb_team.take().map(|team| HoneycombConfig {
        team,
        dataset: std::mem::take(&mut config.honeycomb_dataset),
    });

    tracing_config::configure("ideaboard", std::io::stdout, honeycomb_config)?;

    let server = ideaboard_api::create_server(config).await?;
    let result = server.run().await;

    tracing_config::teardown();

    result?;
    Ok(())
}
