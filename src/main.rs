fn main() {
    rcx_tk::cli::run();
}
