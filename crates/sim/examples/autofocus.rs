//! Runs a pupil pass and then a retina pass against a simulated lens.
//!
//! ```text
//! RUST_LOG=debug cargo run -p focus-sim --example autofocus [config.toml]
//! ```
//!
//! Without a config file the search uses the default calibration with no
//! settle delays.

use std::{env, error::Error, fs};

use focus_core::SearchRange;
use focus_search::{Config, Session, Timing, hill_climb, retina_autofocus};
use focus_sim::{Camera, Motor, Rig, Store, curves};

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let config = match env::args().nth(1) {
        Some(path) => Config::from_toml_str(&fs::read_to_string(path)?)?,
        None => Config::default().with_timing(Timing::immediate())?,
    };

    // A broad pupil response with a narrow retinal peak just below it.
    let pupil = curves::gaussian(52_300, 3_000.0, 100.0);
    let retina = curves::gaussian(51_900, 400.0, 40.0);
    let rig = Rig::new(move |x| pupil(x) + retina(x), 50_000);

    let session = |rig: &Rig| -> Session<Camera, Motor, Store> {
        let (camera, motor, store) = rig.parts();
        Session::new(camera, motor, store, config)
    };

    let range = SearchRange::new(50_000, 46_000, 4_000)?;
    let observer = |event: &hill_climb::Event| -> Option<hill_climb::Action> {
        println!(
            "probe {:>2}: slope {:>9.4} at {} -> step {}",
            event.iter(),
            event.slope(),
            event.sample().position,
            event.move_step()
        );
        None
    };
    let coarse = hill_climb::search(
        session(&rig),
        &range,
        hill_climb::Policy::ConfirmTurns,
        observer,
    )?;
    println!(
        "pupil: {:?} at {} after {} iterations",
        coarse.status, coarse.position, coarse.iters
    );

    let fine = retina_autofocus(session(&rig), 1_000, 50)?;
    println!(
        "retina: {:?} at {} after {} samples ({} moves)",
        fine.status, fine.position, fine.iters, fine.moves
    );

    Ok(())
}
