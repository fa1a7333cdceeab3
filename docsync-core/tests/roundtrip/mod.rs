mod markup;
mod text;
