mod bus;
mod config;
mod map_store;
mod service;
mod simulation;

use bus::Topic;
use map_store::MapStore;
use service::NavigationService;
use simulation::{Simulation, TickReport};

use tracing::{debug, error, info};
use tracing_subscriber::{self, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    info!("Fleet navigation service starting.");

    let app = config::load_config()?;
    let env = app.environment;

    let service = NavigationService::new(
        app.navigation.clone(),
        app.drive.build()?,
        app.region_graph()?,
        MapStore::empty(env.width, env.height)?,
    );
    info!(drive = %service.drive(), regions = service.graph().len(), "Service ready");

    let samples = simulation::region_samples(&app)?;
    service.build_map(env.width, env.height, &samples)?;
    debug!("Planning grid:\n{}", service.map().snapshot().planning_grid());

    let telemetry: Topic<TickReport> = Topic::new("ticks", app.simulation.telemetry_capacity);
    let telemetry_handle = tokio::spawn(simulation::telemetry_task(telemetry.subscribe()));

    let mut sim = Simulation::new(service, &app, telemetry);
    sim.plan_routes();

    match sim.run().await {
        Ok(robots) => {
            let done = robots.iter().filter(|r| r.is_done()).count();
            info!(done, total = robots.len(), "Simulation finished successfully.");
        }
        Err(e) => {
            error!("Simulation failed: {:?}", e);
            return Err(e);
        }
    }

    // The simulation owned the last sender; the telemetry task sees the topic close.
    telemetry_handle.await??;
    info!("Fleet navigation service stopped.");
    Ok(())
}
