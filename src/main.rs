use vortex_lib::services::dashboard::{build_snapshot, today_in};
use vortex_lib::util::format_brl;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let state = match vortex_lib::start().await {
        Ok(state) => state,
        Err(e) => {
            log::error!("Startup failed: {}", e);
            std::process::exit(1);
        }
    };

    let tz = state.config.read().tz();
    let snapshot = build_snapshot(&state, today_in(tz));
    let stats = &snapshot.stats;

    println!("Total leads:       {}", stats.total);
    println!("Conversion rate:   {:.1}%", stats.conversion_rate);
    println!("Predicted revenue: {}", format_brl(stats.predicted_revenue));
    println!("Closed sales:      {}", format_brl(stats.closed_revenue));

    println!();
    for stage in &stats.funnel {
        println!("{:<12} {:>4}  {:>5.1}%", stage.status.label(), stage.count, stage.percentage);
    }

    println!();
    for point in &stats.activity {
        println!("{} {}  {}", point.label, point.date.format("%d/%m"), point.leads);
    }

    println!();
    for row in &snapshot.rows {
        println!(
            "{:<24} {:<24} {:<12} {:>14}  {}",
            row.name,
            row.company,
            row.status.label(),
            row.revenue,
            row.created
        );
    }

    if let Some(toast) = snapshot.toast {
        log::warn!("{}: {}", toast.title, toast.subtitle);
    }
}
