fn main() -> Result<(), Box<dyn std::error::Error>> {
    chatbox::cli::main()
}
