mod delegation;
