mod extensions;
mod invoke;
