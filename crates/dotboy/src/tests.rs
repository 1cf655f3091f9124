use super::*;

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("dotboy-{name}-{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    dir
}

#[test]
fn rom_only() {
    let options = parse_args(args(&["game.gb"])).unwrap();
    assert_eq!(options.rom, PathBuf::from("game.gb"));
    assert_eq!(options.frames, DEFAULT_FRAMES);
    assert_eq!(options.dump, None);
    assert_eq!(options.save_dir, None);
}

#[test]
fn frames_and_flags_in_any_order() {
    let options = parse_args(args(&[
        "--dump", "out.ppm", "game.gb", "--save-dir", "saves", "30",
    ]))
    .unwrap();
    assert_eq!(options.rom, PathBuf::from("game.gb"));
    assert_eq!(options.frames, 30);
    assert_eq!(options.dump, Some(PathBuf::from("out.ppm")));
    assert_eq!(options.save_dir, Some(PathBuf::from("saves")));
}

#[test]
fn bad_arguments_are_rejected() {
    assert!(parse_args(args(&[])).is_err());
    assert!(parse_args(args(&["game.gb", "many"])).is_err());
    assert!(parse_args(args(&["game.gb", "--dump"])).is_err());
    assert!(parse_args(args(&["game.gb", "--fast"])).is_err());
    assert!(parse_args(args(&["game.gb", "1", "2"])).is_err());
}

#[test]
fn file_store_round_trips_and_reports_missing_saves() {
    let dir = scratch_dir("store");
    let mut store = FileRamStore::new(&dir);

    assert_eq!(store.load("POKEMON RED").unwrap(), None);
    store.save("POKEMON RED", &[1, 2, 3]).unwrap();
    assert!(dir.join("POKEMON_RED.sav").exists());
    assert_eq!(store.load("POKEMON RED").unwrap(), Some(vec![1, 2, 3]));

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn ppm_drops_alpha() {
    let frame = vec![0x11; SCREEN_WIDTH * SCREEN_HEIGHT * 4];
    let mut out = Vec::new();
    write_ppm(&mut out, &frame).unwrap();

    let header = b"P6\n160 144\n255\n";
    assert!(out.starts_with(header));
    assert_eq!(out.len(), header.len() + SCREEN_WIDTH * SCREEN_HEIGHT * 3);
}

#[test]
fn run_executes_frames_and_dumps() {
    let dir = scratch_dir("run");
    fs::create_dir_all(&dir).unwrap();

    let mut rom = vec![0u8; 0x8000];
    rom[0x134..0x138].copy_from_slice(b"SPIN");
    rom[0x100] = 0x18;
    rom[0x101] = 0xFE;
    let rom_path = dir.join("spin.gb");
    fs::write(&rom_path, &rom).unwrap();

    let options = RunOptions {
        rom: rom_path,
        frames: 3,
        dump: Some(dir.join("last.ppm")),
        save_dir: None,
    };
    let summary = run(&options).unwrap();

    assert_eq!(summary.frames, 3);
    assert!(summary.samples > 0);
    assert!(summary.serial.is_empty());
    assert!(dir.join("last.ppm").exists());

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn run_reports_missing_rom() {
    let options = RunOptions {
        rom: PathBuf::from("/nonexistent/dotboy/rom.gb"),
        frames: 1,
        dump: None,
        save_dir: None,
    };
    let err = run(&options).unwrap_err();
    assert!(format!("{err:#}").contains("reading ROM"));
}
