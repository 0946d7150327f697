mod manual_eval;
