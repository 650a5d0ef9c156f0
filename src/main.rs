fn main() {
    pkgpicker::run_cli();
}
