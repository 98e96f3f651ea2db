use super::{json_pretty, EXIT_SUCCESS};
use lynx_core::resolve_metrics;

pub fn run(density: f32, json: bool) -> Result<u8, String> {
    if density.is_nan() || density <= 0.0 {
        return Err(format!("density must be positive, got {density}"));
    }
    let metrics = resolve_metrics(density);
    if json {
        println!("{}", json_pretty(&metrics)?);
    } else {
        println!("density_scale:         {}", metrics.density_scale);
        println!("status_bar_height_px:  {}", metrics.status_bar_height_px);
    }
    Ok(EXIT_SUCCESS)
}
