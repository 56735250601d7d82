use report_charts::init_logging;
use report_charts::stock::{parse_cli, run};

fn main() -> anyhow::Result<()> {
    let args = parse_cli()?;
    init_logging(args.verbose);
    let (price, moving) = run(&args)?;
    println!(
        "price chart saved to {} and moving average chart to {}",
        price.display(),
        moving.display()
    );
    Ok(())
}
