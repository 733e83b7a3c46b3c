pub mod dnd_stack;
