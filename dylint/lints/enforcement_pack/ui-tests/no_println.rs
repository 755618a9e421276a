// Test case for NO_PRINTLN lint

fn bad_println() {
    println!("undo applied");
}

fn bad_eprintln() {
    eprintln!("redo refused");
}

fn bad_dbg() {
    let undo_depth = 3;
    dbg!(undo_depth);
}

// Good: using tracing
fn good_tracing() {
    tracing::debug!(undo_depth = 3, "undo");
}

fn main() {
    bad_println();
    bad_eprintln();
    bad_dbg();
    good_tracing();
}
