use std::time::Duration;

use wled::{ApplyOptions, Controller, Ensured, OnUnresolvable};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let my_wled = "192.168.1.50";
    let mut wled = Controller::new(my_wled).on_unresolvable(OnUnresolvable::TurnOff);

    let opts = ApplyOptions::palette("Custom Multi").with_brightness(180);

    // Keep the strand on TwinkleFox, even if something else changes it
    loop {
        match wled.ensure_effect(&opts).await? {
            Ensured::Unchanged(_) => println!("still twinkling"),
            Ensured::Updated(applied) => println!("re-applied: {}", applied.response()),
        }
        println!("last applied: {:?}", wled.last_applied());

        tokio::time::sleep(Duration::from_secs(60)).await;
    }
}
