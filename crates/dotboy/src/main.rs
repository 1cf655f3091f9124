fn main() -> anyhow::Result<()> {
    env_logger::init();

    let options = dotboy::parse_args(std::env::args().skip(1))?;
    log::info!("running {} for {} frames", options.rom.display(), options.frames);

    let summary = dotboy::run(&options)?;

    println!(
        "ran {} frames, {} audio samples",
        summary.frames, summary.samples
    );
    if !summary.serial.is_empty() {
        println!("serial: {}", String::from_utf8_lossy(&summary.serial));
    }
    Ok(())
}
