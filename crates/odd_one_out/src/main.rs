fn main() {
    odd_one_out::run();
}
