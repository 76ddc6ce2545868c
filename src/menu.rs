use std::io::{self, Write};

pub fn show_menu() {
    println!("\n===========================================");
    println!("Fuzzy Thermostat Simulation");
    println!("===========================================");
    println!("Select an option:");
    println!("1. Threaded Simulation Demo");
    println!("2. Async Simulation Demo");
    println!("3. Compare Threaded vs Async");
    println!("4. Export Last Run to CSV");
    println!("5. Exit");
    println!("===========================================");
    print!("Choice (1-5): ");
    io::stdout().flush().unwrap();
}

pub fn get_user_choice() -> Result<u32, std::num::ParseIntError> {
    let mut input = String::new();
    io::stdin().read_line(&mut input).unwrap();
    input.trim().parse::<u32>()
}

pub fn wait_for_enter() {
    println!("\nPress Enter to return to menu...");
    let mut input = String::new();
    io::stdin().read_line(&mut input).unwrap();
}
