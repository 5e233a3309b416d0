pub mod openai_scorer;
