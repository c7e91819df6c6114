fn main() {
    moxy::main();
}
