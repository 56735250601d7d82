use report_charts::census::{parse_cli, run};
use report_charts::init_logging;

fn main() -> anyhow::Result<()> {
    let args = parse_cli()?;
    init_logging(args.verbose);
    log::info!(
        "chart {} of {} - {} for {}",
        args.kind().to_lowercase(),
        args.category,
        args.sub_category,
        args.sub_group
    );
    let fout = run(&args)?;
    println!("census chart saved to {}", fout.display());
    Ok(())
}
